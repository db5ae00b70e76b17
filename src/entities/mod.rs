pub mod favorite_movie;
