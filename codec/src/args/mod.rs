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

//! Subnegotiation payload codecs, one module per option. These operate on
//! an already-unescaped byte slice (the FSM strips IAC-doubling before a
//! payload reaches here); none of them know about framing.

pub mod charset;
pub mod gmcp;
pub mod msdp;
pub mod mssp;
pub mod new_environ;
pub mod naws;
pub mod ttype;
