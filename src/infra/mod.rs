// External infrastructure clients

pub mod group_store;

pub use group_store::GroupStoreClient;
