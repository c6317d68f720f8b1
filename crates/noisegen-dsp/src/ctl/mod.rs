// SPDX-License-Identifier: LGPL-3.0-or-later

//! Control units.

pub mod bypass;
