//! Presentation layer: sidebar/top-bar widgets and the chart panel.

pub mod charts;
pub mod panels;
