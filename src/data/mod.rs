/// Data layer: table model and the per-file sweep stages.
///
/// Architecture:
/// ```text
///  .csv / .xlsx bytes
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse bytes → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cleaner  │  drop duplicate rows, fill numeric gaps (on request)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ projector  │  keep the chosen columns, in the chosen order
///   └───────────┘
///        │
///        ├──────────────────────┐
///        ▼                      ▼
///   ┌────────────┐        ┌──────────┐
///   │ visualizer  │        │ exporter  │  Table → .csv / .xlsx bytes
///   └────────────┘        └──────────┘
/// ```

pub mod cleaner;
pub mod exporter;
pub mod loader;
pub mod model;
pub mod projector;
pub mod visualizer;
