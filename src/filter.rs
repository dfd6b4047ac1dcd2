//! Year filter state and the dashboard event handler.
//!
//! `FilterState` holds the selector's options and the one current value.
//! `Dashboard` owns a `FilterState` per session and turns a selection event
//! into a full recomputation of the visible panels, all from the same filter
//! snapshot.

use tracing::debug;

use crate::aggregate::{PanelOutput, compute_view};
use crate::domain::{View, YearFilter};
use crate::error::AppError;
use crate::io::Dataset;

/// The year selector: fixed option list plus the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    options: Vec<YearFilter>,
    current: YearFilter,
}

impl FilterState {
    /// Options are `All` followed by the dataset's distinct years ascending.
    pub fn new(dataset: &Dataset) -> Self {
        Self::from_years(dataset.years())
    }

    pub fn from_years(years: &[i32]) -> Self {
        let mut sorted = years.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let options = std::iter::once(YearFilter::All)
            .chain(sorted.into_iter().map(YearFilter::Year))
            .collect();

        Self {
            options,
            current: YearFilter::All,
        }
    }

    pub fn options(&self) -> &[YearFilter] {
        &self.options
    }

    pub fn current(&self) -> YearFilter {
        self.current
    }

    /// Replace the current value. Years outside the option list are rejected
    /// and leave the state untouched.
    pub fn select(&mut self, filter: YearFilter) -> Result<(), AppError> {
        if !self.options.contains(&filter) {
            let valid: Vec<String> = self.options.iter().map(|o| o.to_string()).collect();
            return Err(AppError::input(format!(
                "Year {filter} is not in the dataset. Choose from: {}",
                valid.join(", ")
            )));
        }
        self.current = filter;
        Ok(())
    }

    /// The option after the current one (wrapping).
    pub fn next(&self) -> YearFilter {
        self.step(1)
    }

    /// The option before the current one (wrapping).
    pub fn prev(&self) -> YearFilter {
        self.step(-1)
    }

    fn step(&self, delta: isize) -> YearFilter {
        let n = self.options.len() as isize;
        let idx = self
            .options
            .iter()
            .position(|o| *o == self.current)
            .unwrap_or(0) as isize;
        self.options[(idx + delta).rem_euclid(n) as usize]
    }
}

/// Session-scoped dashboard: the filter, the view, and the panels computed
/// for exactly that (filter, view) pair.
#[derive(Debug)]
pub struct Dashboard<'a> {
    dataset: &'a Dataset,
    state: FilterState,
    view: View,
    panels: Vec<PanelOutput>,
}

impl<'a> Dashboard<'a> {
    pub fn new(dataset: &'a Dataset, view: View) -> Self {
        let state = FilterState::new(dataset);
        let panels = compute_view(view, dataset.records(), state.current());
        Self {
            dataset,
            state,
            view,
            panels,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        self.dataset
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn filter(&self) -> YearFilter {
        self.state.current()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn panels(&self) -> &[PanelOutput] {
        &self.panels
    }

    /// Selection event: validate, recompute every panel with the new value,
    /// then publish state and panels together.
    pub fn select(&mut self, filter: YearFilter) -> Result<(), AppError> {
        let mut next_state = self.state.clone();
        next_state.select(filter)?;

        let panels = compute_view(self.view, self.dataset.records(), filter);
        debug!(%filter, panels = panels.len(), "recomputed dashboard panels");

        self.state = next_state;
        self.panels = panels;
        Ok(())
    }

    pub fn select_next(&mut self) -> Result<(), AppError> {
        self.select(self.state.next())
    }

    pub fn select_prev(&mut self) -> Result<(), AppError> {
        self.select(self.state.prev())
    }

    /// Switch view, keeping the current filter.
    pub fn set_view(&mut self, view: View) {
        self.panels = compute_view(view, self.dataset.records(), self.state.current());
        self.view = view;
    }
}
