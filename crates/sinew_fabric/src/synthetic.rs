//! A synthetic switchbox fabric for tests and demos.
//!
//! Every tile is an identical interconnect tile `INT_X{x}Y{y}`. Each tile has
//! long-haul wires in the four compass directions with lengths 1, 2, and 6.
//! A wire is named `{DD}{L}BEG0` where it leaves a tile and `{DD}{L}END0`
//! where it arrives (`EE2BEG0` in `INT_X0Y0` is the same node as `EE2END0`
//! in `INT_X2Y0`). Inside a tile, arriving wires and logic outputs feed eight
//! buffers `INODE0..7`, which drive every leaving wire and the logic inputs.
//! Arriving wires also drive the leaving wire that continues straight on.

use crate::direction::Direction;
use crate::grid::{FabricBuilder, GridFabric};
use crate::ids::{TileId, TileWire, WireId};
use crate::types::WireClass;

/// Lengths of the long-haul wires in each direction.
pub const SPAN_LENGTHS: [u32; 3] = [1, 2, 6];

/// Number of buffer wires per tile.
pub const BUFFER_COUNT: usize = 8;

/// Number of logic output and logic input pins per tile.
pub const PIN_COUNT: usize = 4;

/// Name stem of a long-haul wire, e.g. `EE2`.
pub fn span_stem(direction: Direction, length: u32) -> String {
    let letter = direction.short_name();
    format!("{letter}{letter}{length}")
}

/// Builds a `cols` x `rows` grid of switchbox tiles.
pub fn switchbox_grid(cols: i32, rows: i32) -> GridFabric {
    let mut b = FabricBuilder::new();
    let int = b.add_tile_type("INT");

    let mut spans: Vec<(Direction, u32, WireId, WireId)> = Vec::new();
    for direction in Direction::COMPASS {
        for length in SPAN_LENGTHS {
            let stem = span_stem(direction, length);
            let class = WireClass::span(direction, length);
            let beg = b.add_wire(int, &format!("{stem}BEG0"), class);
            let end = b.add_wire(int, &format!("{stem}END0"), class);
            spans.push((direction, length, beg, end));
        }
    }
    let buffers: Vec<WireId> = (0..BUFFER_COUNT)
        .map(|i| b.add_wire(int, &format!("INODE{i}"), WireClass::buffer()))
        .collect();
    let outs: Vec<WireId> = (0..PIN_COUNT)
        .map(|i| b.add_wire(int, &format!("LOGIC_OUT{i}"), WireClass::pin()))
        .collect();
    let imux: Vec<WireId> = (0..PIN_COUNT)
        .map(|i| b.add_wire(int, &format!("IMUX{i}"), WireClass::pin()))
        .collect();
    let gclk = b.add_wire(int, "GCLK0", WireClass::clock(Direction::North, 1));

    for (k, &(_, _, beg, end)) in spans.iter().enumerate() {
        b.add_pip(int, end, buffers[k % BUFFER_COUNT]);
        b.add_pip(int, end, buffers[(k + 1) % BUFFER_COUNT]);
        b.add_pip(int, end, beg);
    }
    for (i, &out) in outs.iter().enumerate() {
        b.add_pip(int, out, buffers[i]);
        b.add_pip(int, out, buffers[i + PIN_COUNT]);
    }
    for (j, &buf) in buffers.iter().enumerate() {
        for &(_, _, beg, _) in &spans {
            b.add_pip(int, buf, beg);
        }
        b.add_pip(int, buf, imux[j % PIN_COUNT]);
    }
    b.add_pip(int, gclk, buffers[0]);

    let mut tiles: Vec<Vec<TileId>> = Vec::with_capacity(cols.max(0) as usize);
    for x in 0..cols {
        let column = (0..rows)
            .map(|y| b.add_tile(&format!("INT_X{x}Y{y}"), int, x, y))
            .collect();
        tiles.push(column);
    }

    for x in 0..cols {
        for y in 0..rows {
            for &(direction, length, beg, end) in &spans {
                let (dx, dy) = direction.offset();
                let (tx, ty) = (x + dx * length as i32, y + dy * length as i32);
                if tx < 0 || ty < 0 || tx >= cols || ty >= rows {
                    continue;
                }
                b.join(
                    TileWire::new(tiles[x as usize][y as usize], beg),
                    TileWire::new(tiles[tx as usize][ty as usize], end),
                );
            }
        }
    }

    b.build()
}
