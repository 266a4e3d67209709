pub mod docx;
pub mod image;
pub mod table;

pub use image::normalize_image_bytes;
pub use table::{RawGrid, prune_blank, rows_to_records};
