// Mapping engine: catalog -> choice -> enrollment -> row

pub mod catalog;
pub mod mapper;
pub mod resolver;
pub mod row;

pub use catalog::{GroupCatalog, GroupCatalogExtractor, GroupEntry};
pub use mapper::{Enrollment, EnrollmentMapper};
pub use resolver::{ChoiceResolver, ResolvedChoice};
pub use row::{CsvRow, CsvRowBuilder};
