//! Service test infrastructure.

mod db;

pub(crate) use context::TestContext;
