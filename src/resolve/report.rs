//! Batch resolution results

use crate::artifact::Coordinate;
use crate::fetch::ArtifactHandle;
use std::collections::HashMap;

/// Final answer for one coordinate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Found in one of the repositories
    Found(ArtifactHandle),
    /// Not found in any repository
    Unresolved,
}

impl ResolutionOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn handle(&self) -> Option<&ArtifactHandle> {
        match self {
            Self::Found(handle) => Some(handle),
            Self::Unresolved => None,
        }
    }
}

/// Outcomes of one batch, in request order
#[derive(Debug, Clone, Default)]
pub struct ResolutionReport {
    entries: Vec<(Coordinate, ResolutionOutcome)>,
    index: HashMap<Coordinate, usize>,
    fetches: usize,
}

impl ResolutionReport {
    pub(crate) fn push(&mut self, coordinate: Coordinate, outcome: ResolutionOutcome, fetches: usize) {
        self.fetches += fetches;
        if let Some(&i) = self.index.get(&coordinate) {
            self.entries[i].1 = outcome;
            return;
        }
        self.index.insert(coordinate.clone(), self.entries.len());
        self.entries.push((coordinate, outcome));
    }

    pub fn get(&self, coordinate: &Coordinate) -> Option<&ResolutionOutcome> {
        self.index.get(coordinate).map(|&i| &self.entries[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Coordinate, &ResolutionOutcome)> {
        self.entries.iter().map(|(c, o)| (c, o))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn resolved_count(&self) -> usize {
        self.entries.iter().filter(|(_, o)| o.is_found()).count()
    }

    /// Coordinates no repository had
    pub fn unresolved(&self) -> Vec<&Coordinate> {
        self.entries
            .iter()
            .filter(|(_, o)| !o.is_found())
            .map(|(c, _)| c)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(|(_, o)| o.is_found())
    }

    /// Fetcher calls made while producing this report
    pub fn fetches(&self) -> usize {
        self.fetches
    }

    pub fn into_map(self) -> HashMap<Coordinate, ResolutionOutcome> {
        self.entries.into_iter().collect()
    }
}
