pub mod collision;
pub mod entity;
pub mod geom;
pub mod physics;
pub mod rules;
pub mod tile;
