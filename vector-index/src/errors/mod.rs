pub mod vector_index_error;
