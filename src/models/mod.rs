mod file;
mod path;
mod torrent;
mod value;

pub use file::{FileInfo, assign_offsets};
pub use path::{Key, KeyPath};
pub use torrent::{Torrent, TorrentOptions};
pub use value::{Dict, Document, Kind, NotFound, Value};
