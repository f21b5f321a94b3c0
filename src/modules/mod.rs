// Auxiliary modules around the ISBN core

pub mod scanner;
