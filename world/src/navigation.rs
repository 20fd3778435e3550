//! Crew route planning over the two-level tile and door graph.
//!
//! Intra-room legs run A* over the room's own tiles. Inter-room legs follow a
//! room route chosen by the configured [`RoutingStrategy`]; each door crossing
//! contributes the two facing tiles recorded in the rooms' adjacency maps.

use std::{
    cmp::Reverse,
    collections::{BTreeMap, BTreeSet, BinaryHeap, VecDeque},
};

use into_the_light_core::{RoomId, TileCoord};
use thiserror::Error;

use crate::{config::RoutingStrategy, room::Room};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub(crate) enum PathError {
    #[error("no path connects the requested tiles")]
    NoPath,
}

/// Plans a tile path from `start` to `destination`.
///
/// The returned path excludes `start` and ends with `destination`.
pub(crate) fn find_path(
    rooms: &[Room],
    start: TileCoord,
    destination: TileCoord,
    strategy: RoutingStrategy,
) -> Result<Vec<TileCoord>, PathError> {
    let start_room = room_containing(rooms, start).ok_or(PathError::NoPath)?;
    let destination_room = room_containing(rooms, destination).ok_or(PathError::NoPath)?;

    let route = match strategy {
        RoutingStrategy::Greedy => greedy_route(rooms, start_room, destination_room, destination)
            .or_else(|| breadth_first_route(rooms, start_room, destination_room)),
        RoutingStrategy::Shortest => shortest_route(rooms, start_room, start, destination_room),
    }
    .ok_or(PathError::NoPath)?;

    let mut path = Vec::new();
    let mut current = start;
    for hop in route.windows(2) {
        let (from, to) = (hop[0], hop[1]);
        let &(exit, entry) = room(rooms, from)
            .adjacent
            .get(&to)
            .ok_or(PathError::NoPath)?;
        path.extend(astar(room(rooms, from), current, exit)?);
        path.push(entry);
        current = entry;
    }
    path.extend(astar(room(rooms, destination_room), current, destination)?);
    Ok(path)
}

fn room(rooms: &[Room], id: RoomId) -> &Room {
    &rooms[id.get() as usize]
}

fn room_containing(rooms: &[Room], tile: TileCoord) -> Option<RoomId> {
    rooms
        .iter()
        .find(|candidate| candidate.contains(tile))
        .map(|candidate| candidate.id)
}

/// Hops toward the neighbour whose facing tile is closest to the destination.
fn greedy_route(
    rooms: &[Room],
    start: RoomId,
    goal: RoomId,
    destination: TileCoord,
) -> Option<Vec<RoomId>> {
    let mut route = vec![start];
    let mut visited = BTreeSet::from([start]);
    let mut current = start;

    while current != goal {
        let next = room(rooms, current)
            .adjacent
            .iter()
            .filter(|(neighbour, _)| !visited.contains(*neighbour))
            .min_by_key(|(neighbour, (_, entry))| {
                (entry.distance_squared(destination), **neighbour)
            })
            .map(|(neighbour, _)| *neighbour)?;
        let _ = visited.insert(next);
        route.push(next);
        current = next;
    }

    Some(route)
}

fn breadth_first_route(rooms: &[Room], start: RoomId, goal: RoomId) -> Option<Vec<RoomId>> {
    let mut previous: BTreeMap<RoomId, RoomId> = BTreeMap::new();
    let mut queue = VecDeque::from([start]);
    let mut seen = BTreeSet::from([start]);

    while let Some(current) = queue.pop_front() {
        if current == goal {
            return Some(unwind(&previous, start, goal));
        }
        for neighbour in room(rooms, current).adjacent.keys() {
            if seen.insert(*neighbour) {
                let _ = previous.insert(*neighbour, current);
                queue.push_back(*neighbour);
            }
        }
    }

    None
}

/// Dijkstra over rooms, weighting each hop by the tiles walked to reach it.
fn shortest_route(
    rooms: &[Room],
    start: RoomId,
    start_tile: TileCoord,
    goal: RoomId,
) -> Option<Vec<RoomId>> {
    let mut best: BTreeMap<RoomId, (u32, TileCoord)> = BTreeMap::from([(start, (0, start_tile))]);
    let mut previous: BTreeMap<RoomId, RoomId> = BTreeMap::new();
    let mut frontier = BinaryHeap::from([Reverse((0u32, start))]);

    while let Some(Reverse((cost, current))) = frontier.pop() {
        let Some(&(known, entered_at)) = best.get(&current) else {
            continue;
        };
        if cost > known {
            continue;
        }
        if current == goal {
            return Some(unwind(&previous, start, goal));
        }
        for (neighbour, (exit, entry)) in &room(rooms, current).adjacent {
            let candidate = cost + entered_at.manhattan_distance(*exit) + 1;
            let improves = best
                .get(neighbour)
                .map_or(true, |(existing, _)| candidate < *existing);
            if improves {
                let _ = best.insert(*neighbour, (candidate, *entry));
                let _ = previous.insert(*neighbour, current);
                frontier.push(Reverse((candidate, *neighbour)));
            }
        }
    }

    None
}

fn unwind(previous: &BTreeMap<RoomId, RoomId>, start: RoomId, goal: RoomId) -> Vec<RoomId> {
    let mut route = vec![goal];
    let mut current = goal;
    while current != start {
        match previous.get(&current) {
            Some(prior) => {
                current = *prior;
                route.push(current);
            }
            None => break,
        }
    }
    route.reverse();
    route
}

/// A* over a single room's tiles with 4-way moves and a Manhattan heuristic.
///
/// Ties are broken on the tile coordinate so identical inputs always yield the
/// same path. The path excludes `start` and includes `goal`.
fn astar(room: &Room, start: TileCoord, goal: TileCoord) -> Result<Vec<TileCoord>, PathError> {
    if start == goal {
        return Ok(Vec::new());
    }
    if !room.contains(start) || !room.contains(goal) {
        return Err(PathError::NoPath);
    }

    let mut open = BinaryHeap::from([Reverse((start.manhattan_distance(goal), 0u32, start))]);
    let mut cost: BTreeMap<TileCoord, u32> = BTreeMap::from([(start, 0)]);
    let mut came_from: BTreeMap<TileCoord, TileCoord> = BTreeMap::new();

    while let Some(Reverse((_, walked, current))) = open.pop() {
        if current == goal {
            let mut path = vec![goal];
            let mut cursor = goal;
            while let Some(prior) = came_from.get(&cursor) {
                if *prior == start {
                    break;
                }
                path.push(*prior);
                cursor = *prior;
            }
            path.reverse();
            return Ok(path);
        }
        if cost.get(&current).is_some_and(|best| walked > *best) {
            continue;
        }

        for neighbour in neighbours(current) {
            if !room.contains(neighbour) {
                continue;
            }
            let next = walked + 1;
            if cost.get(&neighbour).map_or(true, |best| next < *best) {
                let _ = cost.insert(neighbour, next);
                let _ = came_from.insert(neighbour, current);
                open.push(Reverse((next + neighbour.manhattan_distance(goal), next, neighbour)));
            }
        }
    }

    Err(PathError::NoPath)
}

fn neighbours(tile: TileCoord) -> impl Iterator<Item = TileCoord> {
    let (column, row) = (tile.column(), tile.row());
    [
        row.checked_sub(1).map(|up| TileCoord::new(column, up)),
        Some(TileCoord::new(column + 1, row)),
        Some(TileCoord::new(column, row + 1)),
        column.checked_sub(1).map(|left| TileCoord::new(left, row)),
    ]
    .into_iter()
    .flatten()
}
