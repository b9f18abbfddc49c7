pub mod consts {
    pub mod consts;
}

pub mod database {
    pub mod commands;
    pub mod database;
    pub mod options;
    pub mod request_manager;

    pub mod table {
        pub mod index;
        pub mod query;
        pub mod row;
        pub mod table;
    }
}

pub mod model {
    pub mod participant;
    pub mod statement;
}

pub mod persistence;
pub mod store;
