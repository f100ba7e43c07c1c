mod csv_file;
mod memory;
mod sheets;

pub use csv_file::CsvRosterStore;
pub use memory::MemoryRosterStore;
pub use sheets::SheetsRosterStore;
