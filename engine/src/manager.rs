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

//! Plugin registration, dependency resolution, and enable/disable lifecycle.
//!
//! Registration order is irrelevant: [`PluginManager::build`] performs a
//! Kahn's-algorithm topological sort over the dependency graph declared by
//! [`OptionPlugin::dependencies`] so `on_init` always runs after everything
//! a plugin depends on, and `dispose` unwinds in the opposite order.

use crate::context::{OutboundQueue, PluginContext};
use crate::error::{EngineError, Result};
use crate::plugin::OptionPlugin;
use crate::shared_state::SharedState;
use dashmap::DashMap;
use mudtel_codec::{Mode, SessionEncoding, TelnetOption, TelnetSide};
use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;
use tracing::{debug, warn};

/// Registers [`OptionPlugin`]s, resolves their dependency order, and drives
/// their lifecycle hooks for one session.
pub struct PluginManager {
    /// Plugins in dependency order once `build()` has run; registration
    /// order beforehand.
    plugins: Vec<Box<dyn OptionPlugin>>,
    /// `option -> index into plugins`.
    index: HashMap<TelnetOption, usize>,
    /// Whether each option's plugin is currently considered active, keyed
    /// by the option it handles.
    enabled: DashMap<TelnetOption, bool>,
    built: RwLock<bool>,
}

impl Default for PluginManager {
    fn default() -> Self {
        Self { plugins: Vec::new(), index: HashMap::new(), enabled: DashMap::new(), built: RwLock::new(false) }
    }
}

impl PluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plugin. Must be called before [`Self::build`].
    pub fn register(&mut self, plugin: Box<dyn OptionPlugin>) -> Result<()> {
        if *self.built.read().expect("build flag poisoned") {
            return Err(EngineError::AfterInit);
        }
        let option = plugin.option();
        if self.index.contains_key(&option) {
            return Err(EngineError::DuplicateRegistration(option));
        }
        self.index.insert(option, self.plugins.len());
        self.enabled.insert(option, false);
        self.plugins.push(plugin);
        Ok(())
    }

    /// Resolves dependency order via Kahn's algorithm and runs `on_init` on
    /// each plugin in that order.
    ///
    /// Returns [`EngineError::MissingDependency`] if a plugin depends on an
    /// option with no registered provider, or [`EngineError::DependencyCycle`]
    /// if the graph has one.
    pub fn build(
        &mut self,
        mode: Mode,
        shared: &SharedState,
        encoding: &RwLock<SessionEncoding>,
        outbound: &OutboundQueue,
    ) -> Result<()> {
        for plugin in &self.plugins {
            for dep in plugin.dependencies() {
                if !self.index.contains_key(dep) {
                    return Err(EngineError::MissingDependency { plugin: plugin.name(), missing: dep.name() });
                }
            }
        }

        let order = self.topological_order()?;
        self.reorder(order);

        for i in 0..self.plugins.len() {
            let ctx = PluginContext::new(mode, shared, encoding, outbound, self);
            self.plugins[i].on_init(&ctx);
            debug!(plugin = self.plugins[i].name(), "plugin initialized");
        }

        *self.built.write().expect("build flag poisoned") = true;
        Ok(())
    }

    /// Kahn's algorithm: repeatedly remove nodes with in-degree zero (here,
    /// plugins whose dependencies have all already been placed). Ties break
    /// by ascending registration index for a deterministic order.
    fn topological_order(&self) -> Result<Vec<usize>> {
        let n = self.plugins.len();
        let mut in_degree = vec![0usize; n];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];

        for (i, plugin) in self.plugins.iter().enumerate() {
            for dep in plugin.dependencies() {
                let dep_idx = self.index[dep];
                dependents[dep_idx].push(i);
                in_degree[i] += 1;
            }
        }

        let mut ready: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(n);

        while let Some(i) = ready.pop_front() {
            order.push(i);
            for &dependent in &dependents[i] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.push_back(dependent);
                }
            }
            ready.make_contiguous().sort_unstable();
        }

        if order.len() != n {
            let cycle = (0..n)
                .filter(|&i| in_degree[i] > 0)
                .map(|i| self.plugins[i].name())
                .collect();
            return Err(EngineError::DependencyCycle { cycle });
        }

        Ok(order)
    }

    fn reorder(&mut self, order: Vec<usize>) {
        let mut reordered: Vec<Option<Box<dyn OptionPlugin>>> = self.plugins.drain(..).map(Some).collect();
        let mut new_plugins = Vec::with_capacity(reordered.len());
        for i in order {
            new_plugins.push(reordered[i].take().expect("each index visited once"));
        }
        self.plugins = new_plugins;
        self.index = self.plugins.iter().enumerate().map(|(i, p)| (p.option(), i)).collect();
    }

    /// Marks `option`'s plugin active for `side` and runs its `on_enable` hook.
    pub fn enable(
        &self,
        option: TelnetOption,
        side: TelnetSide,
        mode: Mode,
        shared: &SharedState,
        encoding: &RwLock<SessionEncoding>,
        outbound: &OutboundQueue,
    ) -> Result<()> {
        let idx = *self.index.get(&option).ok_or(EngineError::NotRegistered(option))?;
        self.enabled.insert(option, true);
        let ctx = PluginContext::new(mode, shared, encoding, outbound, self);
        self.plugins[idx].on_enable(&ctx, side);
        Ok(())
    }

    /// Marks `option`'s plugin inactive for `side` and runs its `on_disable`
    /// hook, refusing if another registered plugin still depends on it.
    pub fn disable(
        &self,
        option: TelnetOption,
        side: TelnetSide,
        mode: Mode,
        shared: &SharedState,
        encoding: &RwLock<SessionEncoding>,
        outbound: &OutboundQueue,
    ) -> Result<()> {
        let idx = *self.index.get(&option).ok_or(EngineError::NotRegistered(option))?;

        let dependents: Vec<&'static str> = self
            .plugins
            .iter()
            .filter(|p| p.dependencies().contains(&option) && self.is_enabled(p.option()))
            .map(|p| p.name())
            .collect();
        if !dependents.is_empty() {
            return Err(EngineError::HasDependents { plugin: self.plugins[idx].name(), dependents });
        }

        self.enabled.insert(option, false);
        let ctx = PluginContext::new(mode, shared, encoding, outbound, self);
        self.plugins[idx].on_disable(&ctx, side);
        Ok(())
    }

    /// Runs every plugin's `on_dispose` hook in reverse initialization order.
    pub fn dispose(&self, mode: Mode, shared: &SharedState, encoding: &RwLock<SessionEncoding>, outbound: &OutboundQueue) {
        for plugin in self.plugins.iter().rev() {
            let ctx = PluginContext::new(mode, shared, encoding, outbound, self);
            plugin.on_dispose(&ctx);
        }
    }

    /// Dispatches a reassembled subnegotiation payload to its plugin, if one
    /// is registered for `option`. Unregistered options are logged and
    /// otherwise ignored — `spec.md` treats this as non-fatal.
    pub fn dispatch_subnegotiation(
        &self,
        option: TelnetOption,
        payload: &[u8],
        mode: Mode,
        shared: &SharedState,
        encoding: &RwLock<SessionEncoding>,
        outbound: &OutboundQueue,
    ) {
        let Some(&idx) = self.index.get(&option) else {
            warn!(%option, "subnegotiation for an option with no registered plugin");
            return;
        };
        let ctx = PluginContext::new(mode, shared, encoding, outbound, self);
        self.plugins[idx].on_subnegotiation(&ctx, payload);
    }

    pub fn is_enabled(&self, option: TelnetOption) -> bool {
        self.enabled.get(&option).map(|v| *v).unwrap_or(false)
    }

    pub fn get(&self, option: TelnetOption) -> Option<&dyn OptionPlugin> {
        self.index.get(&option).map(|&i| self.plugins[i].as_ref())
    }

    pub fn all(&self) -> impl Iterator<Item = &dyn OptionPlugin> {
        self.plugins.iter().map(|p| p.as_ref())
    }

    /// Looks up a registered plugin by concrete type.
    pub fn get_plugin<T: OptionPlugin + 'static>(&self) -> Option<&T> {
        self.plugins.iter().find_map(|p| p.as_any().downcast_ref::<T>())
    }
}
