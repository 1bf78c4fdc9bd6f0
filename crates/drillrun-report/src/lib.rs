//! drillrun-report — Results pages for completed drills.

pub mod html;
