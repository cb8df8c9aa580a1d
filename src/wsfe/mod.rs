//! AFIP electronic invoicing (WSFE) export of perceptions.
//!
//! The host builds the fiscal document detail sent to AFIP; this module adds
//! one `Tributo` per perception line to its `Tributos` group.
//!
//! # Example
//!
//! ```ignore
//! use ar_perceptions::wsfe::*;
//!
//! let detail = PerceptionTributes::new(BaseTributes).add_taxes(&invoice, FiscalDetail::default())?;
//! let json = serde_json::to_string(&detail)?;
//! ```

mod tributes;

pub use tributes::{
    BaseTributes, FiscalDetail, PerceptionTributes, TributeHook, Tributo, Tributos,
    add_perception_tributes, perception_tributes,
};
