// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod expiry;
pub mod forms;
pub mod ids;
pub mod model;
pub mod notice;
pub mod request;
pub mod screens;
pub mod state;

pub use expiry::*;
pub use forms::*;
pub use ids::*;
pub use model::*;
pub use notice::*;
pub use request::*;
pub use screens::*;
pub use state::*;
