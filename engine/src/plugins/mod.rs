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

//! The MUD-relevant option plugins enumerated in `spec.md` §4.5, one module
//! each.

pub mod charset;
pub mod echo;
pub mod eor;
pub mod gmcp;
pub mod msdp;
pub mod mssp;
pub mod naws;
pub mod new_environ;
pub mod suppress_ga;
pub mod ttype;

pub use charset::CharsetPlugin;
pub use echo::EchoPlugin;
pub use eor::EorPlugin;
pub use gmcp::GmcpPlugin;
pub use msdp::MsdpPlugin;
pub use mssp::{MsspConfig, MsspPlugin};
pub use naws::NawsPlugin;
pub use new_environ::NewEnvironPlugin;
pub use suppress_ga::SuppressGaPlugin;
pub use ttype::TTypePlugin;
