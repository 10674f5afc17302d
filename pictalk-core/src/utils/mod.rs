pub mod errlog;
pub mod files;
pub mod imaging;
pub mod text;

pub use errlog::log_error;
pub use files::{
    allowed_file, clean_old_uploads, create_required_directories, format_file_size,
    generate_unique_filename, secure_filename,
};
pub use imaging::{create_thumbnail, get_image_info, preprocess_image, validate_image, ImageInfo};
pub use text::{extract_keywords, generate_session_id, sanitize_input};
