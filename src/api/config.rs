// Copyright 2025 Queryengine Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Engine configuration

use crate::core::Result;
use crate::executor::{ExecutionMode, PlannerOptions};

/// Environment variable selecting the default execution mode
pub const MODE_ENV_VAR: &str = "QUERYENGINE_MODE";

/// Configuration options for an [`Engine`](super::Engine)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Strategy used by `query()`
    /// Default: Interpreter
    pub mode: ExecutionMode,

    /// Remove projections that pass their input through unchanged
    /// Default: true
    pub prune_projections: bool,

    /// Fuse common instruction pairs in bytecode programs
    /// Default: true
    pub peephole: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::default(),
            prune_projections: true,
            peephole: true,
        }
    }
}

impl EngineConfig {
    /// Sets the default execution mode
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enables or disables identity projection pruning
    pub fn with_prune_projections(mut self, enabled: bool) -> Self {
        self.prune_projections = enabled;
        self
    }

    /// Enables or disables the bytecode peephole pass
    pub fn with_peephole(mut self, enabled: bool) -> Self {
        self.peephole = enabled;
        self
    }

    /// Defaults, with the mode taken from `QUERYENGINE_MODE` when set.
    ///
    /// Fails with `InvalidArgument` if the variable names no known mode.
    pub fn from_env() -> Result<Self> {
        Self::from_mode_var(std::env::var(MODE_ENV_VAR).ok().as_deref())
    }

    fn from_mode_var(value: Option<&str>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            config.mode = value.parse()?;
        }
        Ok(config)
    }

    /// Options handed to the planner
    pub fn planner_options(&self) -> PlannerOptions {
        PlannerOptions {
            prune_projections: self.prune_projections,
            peephole: self.peephole,
        }
    }
}
