//! Diesel schema for license server persistence.

diesel::table! {
    /// Tracked license servers.
    license_servers (id) {
        /// Internal server identifier.
        id -> Uuid,
        /// Unique vendor name.
        #[max_length = 50]
        vendor -> Varchar,
        /// License manager host.
        #[max_length = 64]
        host -> Varchar,
        /// License manager port.
        port -> Int4,
        /// Optional monitored feature.
        #[max_length = 50]
        feature -> Nullable<Varchar>,
        /// Optional usage database path.
        #[max_length = 255]
        usage_database -> Nullable<Varchar>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Usage database columns subscribed per server.
    subscribed_columns (server_id, column_name) {
        /// Owning server.
        server_id -> Uuid,
        /// Subscribed column name.
        #[max_length = 50]
        column_name -> Varchar,
    }
}

diesel::joinable!(subscribed_columns -> license_servers (server_id));
diesel::allow_tables_to_appear_in_same_query!(license_servers, subscribed_columns);
