//! Hard caps on request inputs. Anything above these is refused before it
//! reaches the store.

pub const MAX_GUEST_NAME_LEN: usize = 256;
pub const MAX_UNIT_ID_LEN: usize = 128;

/// Longest stay a single booking may occupy, in nights. Also bounds the
/// night count a booking may reach through extensions.
pub const MAX_NIGHTS: u32 = 3_650;

/// One request per line; longer lines drop the connection.
pub const MAX_REQUEST_LINE_BYTES: usize = 8 * 1024;
