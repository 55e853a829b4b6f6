mod cancel;
mod event_queue;
