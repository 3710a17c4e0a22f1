//! Live state error types

use thiserror::Error;

use crate::TabId;

#[derive(Error, Debug)]
pub enum TabError {
    #[error("Tab not found: {0}")]
    NotFound(TabId),
}
