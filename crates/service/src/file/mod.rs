pub mod issue_store;
