// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod content_signals;
pub mod fetcher;
pub mod render_engine;
pub mod reqwest_engine;
pub mod traits;
