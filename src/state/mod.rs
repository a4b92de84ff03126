pub mod scan_board;

pub use scan_board::ScanBoard;
