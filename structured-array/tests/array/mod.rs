mod copy;
mod region;
mod support;
