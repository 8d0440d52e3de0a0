use std::path::Path;

use crate::error::Error;
use crate::pairwise::{build_pairwise_table, PairwiseTable};
use crate::parsing::parse_xyt;
use crate::types::Minutia;

/// Minutiae of one fingerprint together with their pairwise table.
pub struct Template {
    minutiae: Box<[Minutia]>,
    table: PairwiseTable,
}

impl Template {
    pub fn new(minutiae: Vec<Minutia>) -> Self {
        let table = build_pairwise_table(&minutiae);
        Template {
            minutiae: minutiae.into_boxed_slice(),
            table,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        Ok(Template::new(parse_xyt(path)?))
    }

    #[inline]
    pub fn minutiae(&self) -> &[Minutia] {
        &self.minutiae
    }

    #[inline]
    pub fn table(&self) -> &PairwiseTable {
        &self.table
    }
}
