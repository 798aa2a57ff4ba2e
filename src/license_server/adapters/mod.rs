//! Adapter implementations for license server ports.

pub mod memory;
pub mod postgres;

mod lmstat;
mod rrdtool;

pub use lmstat::{DEFAULT_LMUTIL_BINARY, LmstatStatusQuery, parse_lmstat_output};
pub use rrdtool::{
    DEFAULT_CONSOLIDATION, DEFAULT_RRDTOOL_BINARY, RrdtoolSampleStore, parse_fetch_output,
    parse_info_columns,
};
