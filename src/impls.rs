pub mod tokener {
    pub mod jwt;
}
