mod build;
mod transports;
