pub mod image_syncer;
pub mod reconciler;
pub mod reconciliation_loop;
pub mod store;
