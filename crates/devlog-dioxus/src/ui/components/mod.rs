pub mod block_frame;
pub mod canvas_page;
pub mod error_screen;
pub mod header;
pub mod image_block;
pub mod notice_dialog;
pub mod post_list;
pub mod post_view;
pub mod static_block;
pub mod text_block;
pub mod toolbar;

pub use block_frame::BlockFrame;
pub use canvas_page::CanvasPage;
pub use error_screen::ErrorScreen;
pub use header::Header;
pub use image_block::ImageBlock;
pub use notice_dialog::{NoticeBox, NoticeDialog};
pub use post_list::{Pagination, PostListPage, PostRow};
pub use post_view::{PostBody, PostViewPage};
pub use static_block::StaticBlock;
pub use text_block::TextBlock;
pub use toolbar::Toolbar;
