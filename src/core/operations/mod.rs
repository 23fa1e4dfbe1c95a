mod file_ops;

pub use file_ops::{
    basename, copy_into_dir, ensure_dir, has_extension, label_path_for_image,
    list_files, remove_file, same_path, FileOpError, FileOpResult,
};
