use crate::{cipher::DataCipher, database::DatabaseId, error::Result};
use frame_common::CiphertextHandle;
use frame_fhe::HomomorphicEngine;

impl<E: HomomorphicEngine> DataCipher<E> {
    /// All entry handles of a database in insertion order.
    pub fn get_entries(&self, id: DatabaseId) -> Result<Vec<CiphertextHandle>> {
        self.state()
            .database(id)
            .map(|database| database.entries().to_vec())
    }
}
