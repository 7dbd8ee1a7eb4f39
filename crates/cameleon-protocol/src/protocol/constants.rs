//! Reserved sentinel strings of the remote protocol.
//!
//! These are wire constants: changing one changes what the controller
//! receives, not just a local name.

/// Schedule-slot sentinel meaning "apply the message with no scheduled
/// delay". Sent in place of a schedule struct.
pub const IMMEDIATELY: &str = "Immediately";

/// Message-name sentinel meaning "leave the current message unchanged".
/// A call with this name never carries the trailing phase/end-time/priority
/// argument group.
pub const DONT_CARE: &str = "DontCare";

/// Message-name sentinel meaning "blank the sign". Like [`DONT_CARE`], it
/// suppresses the trailing argument group.
pub const BLANK: &str = "Blank";

/// Recipient-type token addressing a single sign. Case-sensitive.
pub const DEVICE: &str = "Device";

/// Recipient-type token addressing a sign group. Case-sensitive.
pub const GROUP: &str = "Group";
