//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Error types for the plugin engine.

use mudtel_codec::{CodecError, TelnetOption};
use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced by the plugin manager and byte pipeline.
///
/// Per `spec.md` §7, protocol-level errors are always recovered locally and
/// never reach this type — only configuration-level mistakes (plugin
/// dependency graph problems) and pipeline lifecycle misuse (submitting
/// after shutdown) are returned to the host.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A plugin was registered with a dependency that has no registered
    /// provider.
    #[error("plugin {plugin} depends on unregistered option {missing}")]
    MissingDependency { plugin: &'static str, missing: &'static str },

    /// The dependency graph formed by registered plugins has a cycle;
    /// `build()` cannot produce an initialization order.
    #[error("plugin dependency cycle detected among: {}", .cycle.join(", "))]
    DependencyCycle { cycle: Vec<&'static str> },

    /// An attempt to disable a plugin other plugins still depend on.
    #[error("cannot disable {plugin}: depended on by {}", dependents.join(", "))]
    HasDependents { plugin: &'static str, dependents: Vec<&'static str> },

    /// Two plugins registered for the same option.
    #[error("option {0} already has a registered plugin")]
    DuplicateRegistration(TelnetOption),

    /// A plugin was registered after [`crate::manager::PluginManager::build`] already ran.
    #[error("cannot register a plugin after the manager has been built")]
    AfterInit,

    /// No plugin is registered for the requested option.
    #[error("no plugin registered for option {0}")]
    NotRegistered(TelnetOption),

    /// A byte was submitted after [`crate::pipeline::BytePipeline::shutdown`].
    #[error("pipeline is closed")]
    Closed,

    /// A byte was submitted but the bounded channel has no free capacity;
    /// the caller should apply backpressure rather than block.
    #[error("byte submission channel is full")]
    ChannelFull,

    /// The underlying codec reported a protocol violation while processing
    /// a byte; surfaced here only when a caller asked to observe it (e.g. in
    /// tests) rather than relying on the log line the pipeline already emits.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}
