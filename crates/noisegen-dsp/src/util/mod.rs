// SPDX-License-Identifier: LGPL-3.0-or-later

//! Utility modules.

pub mod randomizer;
