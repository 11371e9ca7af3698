pub mod vector_api_service;
