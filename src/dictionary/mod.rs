// Dictionary module - shortcut entries, validation and the in-memory match index

mod entry;
mod index;

pub use entry::{
    sort_entries, validate_token, DictionaryError, ShortcutEntry, MAX_TOKEN_LEN, RESERVED_PREFIX,
};
pub use index::{is_word_boundary, ShortcutIndex, ShortcutMatch};
