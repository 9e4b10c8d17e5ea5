//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

pub mod anm;
pub mod auth;
pub mod debug;
pub mod error;
pub mod interface;
pub mod packet;
