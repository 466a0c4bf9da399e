pub mod patrol;
pub mod part1;
pub mod part2;
