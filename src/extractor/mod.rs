//! 提取模块：由页面构建检测快照
pub mod snapshot;
pub mod html_extractor;
pub mod globals;
pub mod cookie;
pub mod page_extractor;
pub mod fetch;

pub use self::snapshot::{DomDocument, PageSnapshot, PageSnapshotBuilder, ResourceEntry};
pub use self::html_extractor::{ExtractedSignals, HtmlExtractor};
pub use self::globals::{probe_watch_list, DeclaredGlobals, GlobalScope, NoGlobals, GLOBAL_WATCH_LIST};
pub use self::cookie::parse_cookie_string;
pub use self::page_extractor::{HtmlSnapshotExtractor, PageContext, SnapshotExtractor};
pub use self::fetch::{FetchedPage, PageFetcher};
