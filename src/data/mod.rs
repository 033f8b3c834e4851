/// Data layer: row model, column metadata and the table view pipeline.
///
/// Architecture:
/// ```text
///   /api/data, /api/calculate
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Row>, column types + formats
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  per-column predicates → row indices
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   sort    │  stable, nulls last
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   page    │  20 rows per page
///   └──────────┘
/// ```

pub mod calendar;
pub mod columns;
pub mod filter;
pub mod model;
pub mod page;
pub mod sort;
pub mod template;
pub mod view;
