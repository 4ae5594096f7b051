pub mod mock_scim_server;
pub mod test_data;
