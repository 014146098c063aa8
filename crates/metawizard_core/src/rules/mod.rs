//! Pure naming and keyword rules: natural sort, keyword canonicalization and
//! filename convention checks. Nothing here touches the filesystem.

pub mod filename;
pub mod keywords;
pub mod natural_sort;

pub use filename::{validate_filename, validate_filename_on, FilenameIssue};
pub use keywords::{canonicalize_keyword_list, canonicalize_keywords, make_shib_token_from_folder};
pub use natural_sort::{natural_cmp, natural_key, natural_sort};
